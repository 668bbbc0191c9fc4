// tradechat — a terminal chat client for marketplace conversations
// Copyright (C) 2025  Simon Peter Rothgang
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

pub mod app;
pub mod chat;
pub mod error;
pub mod feed;
pub mod ui;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tradechat", about = "Terminal chat for marketplace conversations")]
pub struct Cli {
    /// Open a specific conversation by id instead of the first one
    #[arg(long)]
    pub chat: Option<String>,

    /// Display name to chat under
    #[arg(long, default_value = "Alex")]
    pub name: String,

    /// Write diagnostics to this file (tracing is disabled without it)
    #[arg(long)]
    pub log_file: Option<std::path::PathBuf>,

    /// Tracing filter directives, e.g. "tradechat=debug"
    #[arg(long)]
    pub log_filter: Option<String>,

    /// Append to the log file instead of truncating it
    #[arg(long)]
    pub log_append: bool,
}

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

//! The message-list reconciliation core: render-list preparation, row
//! height measurement, prepend detection, and scroll-position policy for
//! one conversation at a time.

mod item;
mod measure;
mod prepend;
mod reconcile;
mod session;
mod tuning;

pub use item::{DayDivider, DeliveryState, Message, RenderItem, Sender, divider_id, prepare};
pub use measure::{HeightBatch, ItemRenderer, RowHeights, measure_heights};
pub use prepend::{PrependShift, detect};
pub use reconcile::{ScrollAdjustment, ScrollPhase, ScrollReconciler};
pub use session::{ChatSession, MeasureRequest, SessionCommand};
pub use tuning::ChatTuning;

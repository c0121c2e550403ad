// Copyright 2021 Andrew Conway.
// This file is part of ConcreteSTV.
// ConcreteSTV is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version.
// ConcreteSTV is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the GNU Affero General Public License for more details.
// You should have received a copy of the GNU Affero General Public License along with ConcreteSTV.  If not, see <https://www.gnu.org/licenses/>.


pub mod fixed_point;
pub mod candidate;
pub mod ballot;
pub mod ballot_collection;
pub mod transfer_value;
pub mod threshold;
pub mod tie_resolution;
pub mod transcript;
pub mod election;
pub mod error;
pub mod config;
pub mod random_util;
pub mod signed_version;
pub mod formats;
pub mod methods;

//! Regex-driven syntax highlighting for code, markup and Markdown editors.
//!
//! Copyright 2024 David Edwards
//!
//! Licensed under the Apache License, Version 2.0 (the "License");
//! you may not use this file except in compliance with the License.
//! You may obtain a copy of the License at
//!
//! <https://www.apache.org/licenses/LICENSE-2.0>
//!
//! Unless required by applicable law or agreed to in writing, software
//! distributed under the License is distributed on an "AS IS" BASIS,
//! WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//! See the License for the specific language governing permissions and
//! limitations under the License.
pub mod ansi;
pub mod canvas;
pub mod class;
pub mod color;
pub mod complete;
pub mod config;
pub mod error;
pub mod etc;
pub mod io;
pub mod opt;
pub mod pos;
pub mod schedule;
pub mod session;
pub mod syntax;
pub mod sys;
pub mod theme;
pub mod token;
pub mod watch;
pub mod worker;

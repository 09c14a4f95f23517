// Copyright (c) 2022 RBB S.r.l
// opensource@mintlayer.org
// SPDX-License-Identifier: MIT
// Licensed under the MIT License;
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// https://github.com/mintlayer/mintlayer-core/blob/master/LICENSE
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::{fmt::Display, panic::Location};

use logging::log;

/// Log the error of a `Result` in passing, leaving the value untouched
pub trait TapLog: Sized {
    fn log_err(self) -> Self;
    fn log_warn(self) -> Self;
    fn log_err_pfx(self, prefix: &str) -> Self;
    fn log_lvl(self, level: log::Level) -> Self;
}

const LOG_TARGET: &str = "TapLog";

fn emit(level: log::Level, prefix: Option<&str>, err: &dyn Display, location: &Location) {
    match prefix {
        Some(prefix) => log::log!(
            target: LOG_TARGET,
            level,
            "{prefix}: {err} ({}:{})",
            location.file(),
            location.line()
        ),
        None => log::log!(
            target: LOG_TARGET,
            level,
            "{err} ({}:{})",
            location.file(),
            location.line()
        ),
    }
}

impl<T, E: Display> TapLog for Result<T, E> {
    #[inline(always)]
    #[track_caller]
    fn log_err(self) -> Self {
        if let Err(ref err) = self {
            emit(log::Level::Error, None, err, Location::caller());
        }
        self
    }

    #[inline(always)]
    #[track_caller]
    fn log_warn(self) -> Self {
        if let Err(ref err) = self {
            emit(log::Level::Warn, None, err, Location::caller());
        }
        self
    }

    #[inline(always)]
    #[track_caller]
    fn log_err_pfx(self, prefix: &str) -> Self {
        if let Err(ref err) = self {
            emit(log::Level::Error, Some(prefix), err, Location::caller());
        }
        self
    }

    #[inline(always)]
    #[track_caller]
    fn log_lvl(self, level: log::Level) -> Self {
        if let Err(ref err) = self {
            emit(level, None, err, Location::caller());
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_passes_through() {
        let ok: Result<u32, String> = Ok(5);
        assert_eq!(ok.log_err(), Ok(5));

        let err: Result<u32, String> = Err("boom".to_owned());
        assert_eq!(err.clone().log_warn(), err);
        assert_eq!(err.clone().log_err_pfx("context"), err);
        assert_eq!(err.clone().log_lvl(log::Level::Debug), err);
    }
}

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

/// Early-return unless a condition holds.
///
/// With an error argument, the enclosing function returns `Err(err.into())` when the condition
/// is false. Without one, it returns `None`, for use in functions returning [Option].
///
/// ```
/// # use utils::ensure;
/// #[derive(PartialEq, Eq, Debug)]
/// enum HeightError {
///     NotNext { expected: u64, got: u64 },
/// }
///
/// fn check_next(parent: u64, height: u64) -> Result<(), HeightError> {
///     ensure!(
///         height == parent + 1,
///         HeightError::NotNext { expected: parent + 1, got: height }
///     );
///     Ok(())
/// }
///
/// assert_eq!(check_next(4, 5), Ok(()));
/// assert_eq!(check_next(4, 7), Err(HeightError::NotNext { expected: 5, got: 7 }));
/// ```
#[macro_export]
macro_rules! ensure {
    ($cond:expr $(,)?) => {
        $cond.then_some(())?
    };
    ($cond:expr, $err:expr $(,)?) => {
        $cond.then_some(()).ok_or_else(|| $err)?
    };
}

#[cfg(test)]
mod tests {
    fn checked_halve(x: u32) -> Option<u32> {
        ensure!(x % 2 == 0);
        Some(x / 2)
    }

    fn lazily_built_error(x: u32, built: &mut bool) -> Result<u32, String> {
        ensure!(x > 0, {
            *built = true;
            format!("{x} is zero")
        });
        Ok(x)
    }

    #[test]
    fn option_form() {
        assert_eq!(checked_halve(8), Some(4));
        assert_eq!(checked_halve(7), None);
    }

    #[test]
    fn error_is_only_built_on_failure() {
        let mut built = false;
        assert_eq!(lazily_built_error(3, &mut built), Ok(3));
        assert!(!built);
        assert_eq!(lazily_built_error(0, &mut built), Err("0 is zero".to_owned()));
        assert!(built);
    }
}

//! Dev-mode assertions.
//!
//! These guard against malformed instruction streams. They compile to
//! nothing without the `dev-mode` feature.

use std::fmt::Debug;

pub(crate) const NG_DEV_MODE: bool = cfg!(feature = "dev-mode");

#[track_caller]
pub(crate) fn assert_equal<T: PartialEq + Debug>(actual: T, expected: T, msg: &str) {
    if NG_DEV_MODE && actual != expected {
        throw_error(&format!("{} {:?} == {:?}", msg, actual, expected));
    }
}

#[track_caller]
pub(crate) fn assert_less_than<T: PartialOrd + Debug>(actual: T, expected: T, msg: &str) {
    if NG_DEV_MODE && actual >= expected {
        throw_error(&format!("{} {:?} < {:?}", msg, actual, expected));
    }
}

#[track_caller]
pub(crate) fn assert_true(condition: bool, msg: &str) {
    if NG_DEV_MODE && !condition {
        throw_error(msg);
    }
}

#[track_caller]
pub(crate) fn assert_none<T: Debug>(actual: &Option<T>, msg: &str) {
    if NG_DEV_MODE {
        if let Some(value) = actual {
            throw_error(&format!("{} {:?} == None", msg, value));
        }
    }
}

#[track_caller]
fn throw_error(msg: &str) -> ! {
    panic!("ASSERTION ERROR: {}", msg);
}

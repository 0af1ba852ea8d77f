use std::fmt::Debug;

use crate::error::{Error, Result};
use crate::value::Value;

/// Wraps a parse result for fluent assertions in tests.
pub struct TestResult<T> {
    inner: Result<T>,
}

impl<T: Debug> TestResult<T> {
    pub fn new(result: Result<T>) -> Self {
        Self { inner: result }
    }

    /// Asserts success and returns the value.
    pub fn assert_success(self) -> T {
        match self.inner {
            Ok(val) => val,
            Err(e) => {
                panic!(
                    "\n🔴 TEST FAILED (Expected Success, but got Error):\nMessage:  {}\nLocation: {}\n",
                    e,
                    e.span()
                );
            }
        }
    }

    /// Asserts success and compares the value.
    pub fn assert_success_is<E>(self, expected: E) -> T
    where
        T: PartialEq<E>,
        E: Debug,
    {
        let val = self.assert_success();
        if val != expected {
            panic!(
                "\n🔴 TEST FAILED (Value Mismatch):\nExpected: {:?}\nGot:      {:?}\n",
                expected, val
            );
        }
        val
    }

    /// Asserts failure and returns the error.
    pub fn assert_failure(self) -> Error {
        match self.inner {
            Ok(val) => {
                panic!(
                    "\n🔴 TEST FAILED (Expected Failure, but got Success):\nParsed Value: {:?}\n",
                    val
                );
            }
            Err(e) => e,
        }
    }

    /// Asserts failure with a message containing `expected_msg_part`.
    pub fn assert_failure_contains(self, expected_msg_part: &str) -> Error {
        let err = self.assert_failure();
        let actual_msg = err.to_string();
        if !actual_msg.contains(expected_msg_part) {
            panic!(
                "\n🔴 TEST FAILED (Error Message Mismatch):\nExpected part: {:?}\nActual msg:    {:?}\nLocation:      {}\n",
                expected_msg_part,
                actual_msg,
                err.span()
            );
        }
        err
    }

    /// Asserts a labeled failure carrying `label`.
    pub fn assert_labeled(self, label: &str) -> Error {
        let err = self.assert_failure();
        if err.label() != Some(label) {
            panic!(
                "\n🔴 TEST FAILED (Label Mismatch):\nExpected label: {:?}\nActual error:   {}\n",
                label, err
            );
        }
        err
    }
}

impl TestResult<Option<Value>> {
    /// Asserts success and returns the matched text.
    pub fn assert_matches(self, expected_text: &str) -> Value {
        let value = match self.assert_success() {
            Some(value) => value,
            None => panic!(
                "\n🔴 TEST FAILED (Empty Result):\nExpected text: {:?}\n",
                expected_text
            ),
        };
        if value.text() != expected_text {
            panic!(
                "\n🔴 TEST FAILED (Text Mismatch):\nExpected: {:?}\nGot:      {:?}\n",
                expected_text,
                value.text()
            );
        }
        value
    }
}

pub trait Testable<T> {
    fn test(self) -> TestResult<T>;
}

impl<T: Debug> Testable<T> for Result<T> {
    fn test(self) -> TestResult<T> {
        TestResult::new(self)
    }
}

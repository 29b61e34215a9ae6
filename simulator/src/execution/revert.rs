use std::fmt;

use super::ExecutionError;
use crate::Fr;

/// Identifies a call frame in a revert trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallFrameInfo {
    pub address: Fr,
    pub function_selector: u32,
}

impl fmt::Display for CallFrameInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{:#010x}", self.address, self.function_selector)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevertCause {
    /// Interpreter fault.
    Failed(ExecutionError),
    /// Explicit `Revert`, with its revert data.
    Reverted(Vec<Fr>),
}

impl fmt::Display for RevertCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(err) => write!(f, "{err}"),
            Self::Reverted(data) => {
                write!(f, "reverted with [")?;
                for (i, word) in data.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{word}")?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Why a call frame did not return normally, annotated with the frames the
/// failure passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AvmRevertReason {
    pub frame: CallFrameInfo,
    pub cause: RevertCause,
    /// Failure of the last nested call this frame made, if any.
    pub nested: Option<Box<AvmRevertReason>>,
}

impl AvmRevertReason {
    /// Frames from the outermost to the innermost.
    pub fn call_stack(&self) -> Vec<CallFrameInfo> {
        let mut stack = vec![self.frame];
        let mut current = self;
        while let Some(nested) = &current.nested {
            stack.push(nested.frame);
            current = nested;
        }
        stack
    }

    /// Cause recorded by the innermost frame.
    pub fn root_cause(&self) -> &RevertCause {
        match &self.nested {
            Some(nested) => nested.root_cause(),
            None => &self.cause,
        }
    }
}

impl fmt::Display for AvmRevertReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.cause, self.frame)?;
        if let Some(nested) = &self.nested {
            write!(f, "\n  caused by: {nested}")?;
        }
        Ok(())
    }
}

impl std::error::Error for AvmRevertReason {}

#[cfg(test)]
mod tests {
    use super::*;

    fn info(address: u64) -> CallFrameInfo {
        CallFrameInfo {
            address: Fr::from(address),
            function_selector: address as u32,
        }
    }

    #[test]
    fn test_call_stack_walks_nested_reasons() {
        let reason = AvmRevertReason {
            frame: info(1),
            cause: RevertCause::Reverted(vec![]),
            nested: Some(Box::new(AvmRevertReason {
                frame: info(2),
                cause: RevertCause::Failed(ExecutionError::DivisionByZero),
                nested: None,
            })),
        };
        assert_eq!(reason.call_stack(), vec![info(1), info(2)]);
        assert_eq!(
            reason.root_cause(),
            &RevertCause::Failed(ExecutionError::DivisionByZero)
        );
        let rendered = reason.to_string();
        assert!(rendered.contains("reverted with []"));
        assert!(rendered.contains("caused by: division by zero"));
    }
}

//! Opcode semantics. Each handler resolves its operands, checks tags, and
//! tells the interpreter where to go next.

pub(crate) mod accrued_substate;
pub(crate) mod arithmetic;
pub(crate) mod control_flow;
pub(crate) mod environment;
pub(crate) mod external_calls;
pub(crate) mod gadgets;
pub(crate) mod memory;
pub(crate) mod misc;
pub(crate) mod world_state;

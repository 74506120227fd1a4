//! The interpreter's bookkeeping: variables, arrays, DATA, the FOR and
//! GOSUB stacks, and user-defined functions.

pub mod data;
pub mod functions;
pub mod stack;
pub mod vars;

pub use data::DataManager;
pub use functions::{FunctionManager, UserFunction};
pub use stack::{ForFrame, ForStack, GosubStack};
pub use vars::{canonical_name, var_type, ArrayManager, VarType, VariableManager};

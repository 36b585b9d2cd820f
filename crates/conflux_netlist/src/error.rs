//! Errors raised by module editing.

/// Misuse of the module editor.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NetlistError {
    /// A port, signal, parameter, or instance name is already taken.
    #[error("`{name}` is already declared in module `{module}`")]
    Duplicate {
        /// The module being edited.
        module: String,
        /// The clashing name.
        name: String,
    },
}

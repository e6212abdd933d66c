use crate::principal::PrincipalHandle;

/// Security context of a request, carrying the second route to the
/// request's principal.
///
/// The permission middleware publishes decisions both to the directly
/// injected [`PrincipalHandle`] extension and to the handle reachable
/// through this context; the two may or may not share state.
#[derive(Debug, Clone)]
pub struct SecurityContext {
    user_principal: PrincipalHandle,
}

impl SecurityContext {
    pub fn new(user_principal: PrincipalHandle) -> Self {
        Self { user_principal }
    }

    pub fn user_principal(&self) -> &PrincipalHandle {
        &self.user_principal
    }
}

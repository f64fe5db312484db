//! Policy-driven authorization extractor.
//!
//! [`Authorized<P>`] wraps [`AuthUser`] and evaluates the core policy table
//! for `P::OPERATION` before the handler body runs. Each route names its
//! operation through a marker type from [`policy`]:
//!
//! ```ignore
//! async fn confirm(
//!     Authorized(user, _): Authorized<policy::ConfirmRegistration>,
//! ) -> AppResult<Json<()>> {
//!     Ok(Json(()))
//! }
//! ```

use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use eventhub_core::authorization::{authorize, Operation};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Binds a marker type to an [`Operation`].
pub trait Policy {
    const OPERATION: Operation;
}

/// An authenticated caller whose role is allowed to perform `P::OPERATION`.
///
/// Rejects with 401 when unauthenticated and 403 when the role is not in the
/// policy table entry.
pub struct Authorized<P: Policy>(pub AuthUser, pub PhantomData<P>);

impl<P> FromRequestParts<AppState> for Authorized<P>
where
    P: Policy + Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        authorize(P::OPERATION, &user.role)?;
        Ok(Authorized(user, PhantomData))
    }
}

macro_rules! policies {
    ($($name:ident),+ $(,)?) => {
        $(
            #[doc = concat!("Marker for [`Operation::", stringify!($name), "`].")]
            pub struct $name;

            impl super::Policy for $name {
                const OPERATION: super::Operation = super::Operation::$name;
            }
        )+
    };
}

/// One marker type per routed operation.
pub mod policy {
    policies! {
        CreateRegistration,
        ListManagedRegistrations,
        ListOwnRegistrations,
        ViewRegistration,
        ConfirmRegistration,
        CancelRegistration,
        SelfDeleteRegistration,
        RemoveRegistration,
        SubmitPayment,
        ListManagedPayments,
        ReviewPayment,
        ViewRegistrationPayment,
        CreateEvent,
        UpdateEvent,
        ViewEvent,
        ListOwnEvents,
        SetEventState,
        DeleteEvent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn markers_bind_their_operation() {
        assert_eq!(
            <policy::ConfirmRegistration as Policy>::OPERATION,
            Operation::ConfirmRegistration
        );
        assert_eq!(<policy::SetEventState as Policy>::OPERATION, Operation::SetEventState);
    }
}

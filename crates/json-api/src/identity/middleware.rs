//! Identity middleware.

use salvo::prelude::*;
use storefront_app::domain::users::records::UserUuid;
use uuid::Uuid;

use crate::{
    extensions::*,
    identity::{Identity, ROLE_HEADER, Role, USER_HEADER},
};

#[salvo::handler]
pub(crate) async fn handler(
    req: &mut Request,
    depot: &mut Depot,
    res: &mut Response,
    ctrl: &mut FlowCtrl,
) {
    let Some(user) = req
        .header::<String>(USER_HEADER)
        .and_then(|value| Uuid::parse_str(value.trim()).ok())
    else {
        res.render(StatusError::unauthorized().brief("Missing or invalid x-user-uuid header"));
        ctrl.skip_rest();

        return;
    };

    let role = match req.header::<String>(ROLE_HEADER) {
        None => Role::Customer,
        Some(value) => match value.parse::<Role>() {
            Ok(role) => role,
            Err(error) => {
                res.render(StatusError::unauthorized().brief(error.to_string()));
                ctrl.skip_rest();

                return;
            }
        },
    };

    depot.insert_identity(Identity {
        user: UserUuid::from_uuid(user),
        role,
    });

    ctrl.call_next(req, depot, res).await;
}

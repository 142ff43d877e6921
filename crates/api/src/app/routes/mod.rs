use axum::{Router, routing::get};

use carehub_pathology::LabOrder;
use carehub_patients::Patient;
use carehub_staff::StaffMember;

pub mod auth;
pub mod body;
pub mod rbac;
pub mod resources;
pub mod system;

/// Router for all authenticated (tenant-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest("/auth", auth::router())
        .nest("/rbac", rbac::router())
        .nest("/patients", resources::router::<Patient>())
        .nest("/staff", resources::router::<StaffMember>())
        .nest("/pathology/orders", resources::router::<LabOrder>())
}

//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! POST  /api/auth/login                          - Exchange credentials for a token
//!
//! # Inventory
//! GET   /api/inventory/items                     - List items
//! POST  /api/inventory/items                     - Create item (admin)
//! PATCH /api/inventory/items/{id}                - Update name/quantity (admin)
//! PATCH /api/inventory/items/{id}/type           - Change consumable/reusable (admin)
//! DELETE /api/inventory/items/{id}               - Delete item (admin)
//! POST  /api/inventory/requests                  - Request stock (reserves it)
//! GET   /api/inventory/requests/me               - My requests
//! GET   /api/inventory/requests                  - Pending queue (admin)
//! POST  /api/inventory/requests/{id}/approve     - Approve (admin)
//! POST  /api/inventory/requests/{id}/reject      - Reject, restock (admin)
//! POST  /api/inventory/requests/{id}/confirm-return - Confirm return, restock (admin)
//!
//! # Jobs
//! GET   /api/jobs                                - Paginated listing
//! POST  /api/jobs                                - Create (admin)
//! GET   /api/jobs/me                             - My assigned jobs
//! GET   /api/jobs/unassigned                     - Jobs nobody is on yet
//! GET   /api/jobs/{id}                           - Detail with comments and time logs
//! PATCH /api/jobs/{id}                           - Edit (admin)
//! DELETE /api/jobs/{id}                          - Delete (admin)
//! POST  /api/jobs/{id}/assign                    - Assign a user (admin)
//! PATCH /api/jobs/{id}/status                    - Status change, auto-restock on completed
//! POST  /api/jobs/{id}/complete                  - Complete with return manifest
//! POST  /api/jobs/{id}/history                   - Completion report
//! POST  /api/jobs/{id}/comments                  - Comment
//! POST  /api/jobs/{id}/timelog/start             - Start timer
//! POST  /api/jobs/{id}/timelog/stop              - Stop timer
//!
//! # Tickets, notifications, users, positions, reports
//! POST  /api/tickets                             - Report an issue
//! GET   /api/tickets/me                          - My tickets
//! GET   /api/tickets                             - All tickets (admin)
//! PATCH /api/tickets/{id}                        - Update status/assignee (admin)
//! GET   /api/notifications/me                    - Latest 50
//! PATCH /api/notifications/{id}/read             - Mark read (owner only)
//! GET   /api/users/me                            - My profile
//! GET   /api/users                               - All users (admin)
//! PATCH /api/users/{id}                          - Edit profile (admin)
//! PATCH /api/users/{id}/status                   - Availability (admin)
//! GET   /api/positions                           - List positions
//! GET   /api/reports/employee-productivity       - 30-day completions per employee (admin)
//! GET   /api/reports/top-items                   - Top 5 requested items (admin)
//! GET   /api/reports/completed-jobs-trend        - date_trunc buckets (admin)
//! ```

pub mod auth;
pub mod inventory;
pub mod jobs;
pub mod notifications;
pub mod positions;
pub mod reports;
pub mod tickets;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the combined API router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(inventory::router())
        .merge(jobs::router())
        .merge(tickets::router())
        .merge(notifications::router())
        .merge(users::router())
        .merge(positions::router())
        .merge(reports::router())
}

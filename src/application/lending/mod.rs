mod dashboard;
mod service;

pub use dashboard::{DashboardSummary, get_dashboard_summary, list_overdue_lendings};
pub use service::{
    get_active_borrowings, get_book_history, get_user_lending_history, lend_book, mark_returned,
};

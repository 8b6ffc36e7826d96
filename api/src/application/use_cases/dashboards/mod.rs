pub mod admin_dashboard;
pub mod member_dashboards;

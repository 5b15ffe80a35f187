pub mod http_attendance_service;

pub mod generation_service;
pub mod grading_service;
pub mod result_service;
pub mod session_service;

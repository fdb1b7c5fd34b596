//! Game scenario tests

mod clock_tests;
mod negotiation_tests;
mod service_tests;
mod session_tests;

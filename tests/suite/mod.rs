//! Integration test suite modules

mod end_to_end;
mod service_payloads;

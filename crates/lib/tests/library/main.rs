mod common;
mod orchestration_tests;

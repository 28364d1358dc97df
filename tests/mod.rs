mod support;

mod http_tests;
mod status_tests;

mod auth_tests;
mod catalog_tests;
mod health_tests;

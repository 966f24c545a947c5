pub mod failing_repository;

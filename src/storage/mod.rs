pub mod backing_database;

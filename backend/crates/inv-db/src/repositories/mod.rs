pub mod inventory_repository;

pub mod dag_manager;

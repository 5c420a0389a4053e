pub mod detection_service;

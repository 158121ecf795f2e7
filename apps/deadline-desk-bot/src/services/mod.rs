pub mod qr_service;

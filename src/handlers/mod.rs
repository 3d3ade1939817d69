pub mod bucketlist_handlers;
pub mod destination_handlers;
pub mod health_handlers;

pub mod address;
pub mod advert;
pub mod interface;
pub mod neighbour;
pub mod packet;
pub mod route;

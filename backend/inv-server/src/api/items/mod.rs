pub mod create_item_request;
pub mod item_dto;
pub mod item_list_response;
pub mod item_response;
pub mod items;
pub mod update_item_request;

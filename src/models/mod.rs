pub mod category;
pub mod laundry;
pub mod otp;
pub mod user;

pub use category::{Category, CategoryInput};
pub use laundry::{
    AddLaundryRequest, Laundry, LaundryFilter, LaundryItem, LaundryItemInput, LaundryListParams,
    LaundryResponse, LaundryStatus, StatusUpdateRequest,
};
pub use otp::OtpAction;
pub use user::{Role, User};

use kernel::id::Id;

pub struct AccountMarker;
pub type AccountId = Id<AccountMarker>;

pub struct OtpMarker;
pub type OtpId = Id<OtpMarker>;

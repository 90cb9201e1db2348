//! GraphQL documents for the Galxe `/query` endpoint.
//!
//! Trimmed to the fields this bot actually reads; operation names must stay
//! exactly as the platform expects them.

pub const SIGN_IN: &str = "mutation SignIn($input: Auth) {\n  signin(input: $input)\n}";

pub const USERNAME_EXISTS: &str = "query UserNameExists($username: String!) {\n  userNameExists(username: $username) {\n    exists\n    errorMessage\n    __typename\n  }\n}";

pub const GALXE_ID_EXIST: &str =
    "query GalxeIDExist($schema: String!) {\n  galxeIdExist(schema: $schema)\n}";

pub const CREATE_NEW_ACCOUNT: &str = "mutation CreateNewAccount($input: CreateNewAccount!) {\n  createNewAccount(input: $input)\n}";

pub const BASIC_USER_INFO: &str = "query BasicUserInfo($address: String!) {\n  addressInfo(address: $address) {\n    id\n    username\n    avatar\n    address\n    hasEmail\n    hasTwitter\n    hasDiscord\n    __typename\n  }\n}";

pub const CAMPAIGN_DETAIL: &str = "query CampaignDetailAll($id: ID!, $address: String!, $withAddress: Boolean!) {\n  campaign(id: $id) {\n    id\n    name\n    type\n    status\n    recurringType\n    loyaltyPoints\n    claimedLoyaltyPoints(address: $address) @include(if: $withAddress)\n    whitelistInfo(address: $address) {\n      address\n      maxCount\n      usedCount\n      claimedLoyaltyPoints\n      currentPeriodClaimedLoyaltyPoints\n      currentPeriodMaxLoyaltyPoints\n      __typename\n    }\n    credentialGroups(address: $address) {\n      id\n      claimedLoyaltyPoints\n      __typename\n    }\n    gamification {\n      id\n      type\n      __typename\n    }\n    __typename\n  }\n}";

pub const ADD_TYPED_CREDENTIAL_ITEMS: &str = "mutation AddTypedCredentialItems($input: MutateTypedCredItemInput!) {\n  typedCredentialItems(input: $input) {\n    id\n    __typename\n  }\n}";

pub const SYNC_CREDENTIAL_VALUE: &str = "mutation SyncCredentialValue($input: SyncCredentialValueInput!) {\n  syncCredentialValue(input: $input) {\n    value {\n      allow\n      survey {\n        answers\n        __typename\n      }\n      quiz {\n        allow\n        correct\n        __typename\n      }\n      __typename\n    }\n    message\n    __typename\n  }\n}";

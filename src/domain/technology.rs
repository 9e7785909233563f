use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Communication technology spoken by devices, rooms and recording services.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Technology {
    #[serde(rename = "H323")]
    H323,
    #[serde(rename = "SIP")]
    Sip,
    #[serde(rename = "ADOBE_CONNECT")]
    AdobeConnect,
    #[serde(rename = "RTMP")]
    Rtmp,
    #[serde(rename = "SKYPE_FOR_BUSINESS")]
    SkypeForBusiness,
}

impl fmt::Display for Technology {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Technology::H323 => "H.323",
            Technology::Sip => "SIP",
            Technology::AdobeConnect => "Adobe Connect",
            Technology::Rtmp => "RTMP",
            Technology::SkypeForBusiness => "Skype for Business",
        };
        write!(f, "{}", name)
    }
}

/// Ordered set so that iteration (and therefore every decision built on it) is deterministic.
pub type TechnologySet = BTreeSet<Technology>;

pub fn format_technologies(technologies: &TechnologySet) -> String {
    if technologies.is_empty() {
        return "any technology".to_string();
    }
    technologies.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

/// Kind of an alias a provider can hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AliasType {
    #[serde(rename = "H323_E164")]
    H323E164,
    #[serde(rename = "H323_URI")]
    H323Uri,
    #[serde(rename = "H323_IP")]
    H323Ip,
    #[serde(rename = "SIP_URI")]
    SipUri,
    #[serde(rename = "SIP_IP")]
    SipIp,
    #[serde(rename = "ADOBE_CONNECT_URI")]
    AdobeConnectUri,
    #[serde(rename = "ROOM_NAME")]
    RoomName,
}

impl AliasType {
    /// Technology the alias is dialed with. `RoomName` is technology independent.
    pub fn technology(&self) -> Option<Technology> {
        match self {
            AliasType::H323E164 | AliasType::H323Uri | AliasType::H323Ip => Some(Technology::H323),
            AliasType::SipUri | AliasType::SipIp => Some(Technology::Sip),
            AliasType::AdobeConnectUri => Some(Technology::AdobeConnect),
            AliasType::RoomName => None,
        }
    }
}

impl fmt::Display for AliasType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AliasType::H323E164 => "H.323 E.164 number",
            AliasType::H323Uri => "H.323 URI",
            AliasType::H323Ip => "H.323 IP",
            AliasType::SipUri => "SIP URI",
            AliasType::SipIp => "SIP IP",
            AliasType::AdobeConnectUri => "Adobe Connect URI",
            AliasType::RoomName => "room name",
        };
        write!(f, "{}", name)
    }
}

/// A concrete, dialable alias.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Alias {
    pub alias_type: AliasType,
    pub value: String,
}

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.value, self.alias_type)
    }
}

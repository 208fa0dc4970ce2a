use std::fmt::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::concepts::address::Address;
use crate::feedback::AdvertError;
use crate::util::Cost;

const FIELD_SEP: &str = "/";
const ENTRY_SEP: &str = "//";
const NAME_SEP: &str = "///";

/// One row of an advertiser's routing table.
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct AdvertisedRoute {
    pub destination: Address,
    /// the outgoing interface on the advertiser, informational only
    pub interface: usize,
    pub cost: Cost,
}

/// The payload of a control packet: a router's full routing table, tagged with its name.
///
/// Text form: `name///dest/interface/cost//dest/interface/cost//`
#[derive(Clone, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Advertisement {
    pub advertiser: Address,
    pub routes: Vec<AdvertisedRoute>,
}

impl Advertisement {
    pub fn to_payload(&self) -> String {
        let mut out = String::with_capacity(8 + self.routes.len() * 12);
        out.push_str(self.advertiser.as_str());
        out.push_str(NAME_SEP);
        for route in &self.routes {
            // writing to a String cannot fail
            let _ = write!(
                out,
                "{}{FIELD_SEP}{}{FIELD_SEP}{}{ENTRY_SEP}",
                route.destination.as_str(),
                route.interface,
                route.cost
            );
        }
        out
    }

    pub fn parse(payload: &[u8]) -> Result<Self, AdvertError> {
        let text = std::str::from_utf8(payload).map_err(|_| AdvertError::NotUtf8)?;
        let (name, body) = text
            .split_once(NAME_SEP)
            .ok_or(AdvertError::MissingSeparator)?;
        let advertiser = Address::new(name)?;

        let mut routes = Vec::new();
        if !body.is_empty() {
            let body = body
                .strip_suffix(ENTRY_SEP)
                .ok_or(AdvertError::Unterminated)?;
            for entry in body.split(ENTRY_SEP) {
                routes.push(Self::parse_entry(entry)?);
            }
        }
        Ok(Self { advertiser, routes })
    }

    fn parse_entry(entry: &str) -> Result<AdvertisedRoute, AdvertError> {
        let fields: Vec<&str> = entry.split(FIELD_SEP).collect();
        let [destination, interface, cost] = fields[..] else {
            return Err(AdvertError::FieldCount {
                entry: entry.to_string(),
            });
        };
        Ok(AdvertisedRoute {
            destination: Address::new(destination)?,
            interface: interface.parse().map_err(|_| AdvertError::BadNumber {
                entry: entry.to_string(),
                field: "interface",
            })?,
            cost: cost.parse().map_err(|_| AdvertError::BadNumber {
                entry: entry.to_string(),
                field: "cost",
            })?,
        })
    }
}

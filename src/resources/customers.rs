use chrono::{DateTime, Utc};
use http::Method;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::errors::SiigoError;
use crate::resources::list_items;
use crate::transport::{RequestOptions, Transport};
use crate::utils::constants::CUSTOMERS_PATH;

/// Identification type: `(code, name)`.
pub const ID_TYPE_CC: (&str, &str) = ("13", "CC");
pub const ID_TYPE_NIT: (&str, &str) = ("31", "NIT");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IdType {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiscalResponsibility {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub country_name: Option<String>,
    #[serde(default)]
    pub state_code: Option<i64>,
    #[serde(default)]
    pub state_name: Option<String>,
    #[serde(default)]
    pub city_code: Option<String>,
    #[serde(default)]
    pub city_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Address {
    pub address: String,
    pub city: City,
    #[serde(default)]
    pub postal_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Phone {
    #[serde(default)]
    pub indicative: Option<String>,
    #[serde(default)]
    pub number: Option<String>,
    #[serde(default)]
    pub extension: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<Phone>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerMetadata {
    pub created: DateTime<Utc>,
}

/// Customer record. Unknown keys in the payload are ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    /// "Person" or "Company"
    pub person_type: String,
    pub id_type: IdType,
    pub identification: String,
    pub branch_office: i64,
    #[serde(default)]
    pub check_digit: Option<String>,
    #[serde(default)]
    pub name: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub commercial_name: Option<String>,
    pub active: bool,
    pub vat_responsible: bool,
    #[serde(default)]
    pub fiscal_responsibilities: Vec<FiscalResponsibility>,
    #[serde(default)]
    pub address: Option<Address>,
    #[serde(default)]
    pub phones: Vec<Phone>,
    #[serde(default)]
    pub contacts: Vec<Contact>,
    #[serde(default)]
    pub comments: Option<String>,
    #[serde(default)]
    pub metadata: Option<CustomerMetadata>,
}

/// `/v1/customers`
pub struct CustomersResource<'a> {
    transport: &'a Transport,
    base: String,
}

impl<'a> CustomersResource<'a> {
    pub fn new(transport: &'a Transport) -> Self {
        Self {
            base: format!("{}{}", transport.base_url(), CUSTOMERS_PATH),
            transport,
        }
    }

    pub fn url(&self) -> &str {
        &self.base
    }

    /// Code for an identification type label (`CC`, `NIT`), case-insensitive.
    pub fn id_type_code(id_type: &str) -> Option<&'static str> {
        match id_type.to_uppercase().as_str() {
            "CC" => Some(ID_TYPE_CC.0),
            "NIT" => Some(ID_TYPE_NIT.0),
            _ => None,
        }
    }

    /// Lists customers, optionally only those created from `created_start` on.
    pub async fn list(&self, created_start: Option<&str>) -> Result<Vec<Customer>, SiigoError> {
        let mut options = RequestOptions::new();
        if let Some(start) = created_start.filter(|s| !s.is_empty()) {
            options = options.param("created_start", start);
        }

        let response = self.transport.request(Method::GET, &self.base, options).await?;
        let items = list_items(response.json_value()?);
        debug!("customers list returned {} items", items.len());

        items
            .into_iter()
            .map(|item| serde_json::from_value(item).map_err(SiigoError::from))
            .collect()
    }

    pub async fn create<T: Serialize + ?Sized>(&self, customer: &T) -> Result<Customer, SiigoError> {
        let options = RequestOptions::new().json(customer)?;
        let response = self.transport.request(Method::POST, &self.base, options).await?;
        response.json()
    }
}

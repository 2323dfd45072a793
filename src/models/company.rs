use serde::{Deserialize, Serialize};
use validator::{Validate, ValidateUrl, ValidationError};

use crate::db::models::{Company, CompanyChanges, NewCompany};

/// Empty, or an absolute http(s) URL.
fn validate_website(website: &str) -> Result<(), ValidationError> {
    if website.is_empty() {
        return Ok(());
    }
    let http = website.starts_with("http://") || website.starts_with("https://");
    if http && website.validate_url() {
        Ok(())
    } else {
        Err(ValidationError::new("url"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct Address {
    #[validate(length(min = 1, max = 100))]
    pub street: String,
    #[validate(length(min = 1, max = 10))]
    pub num_ext: String,
    #[validate(length(min = 1, max = 8))]
    pub zip_code: String,
    pub state: i32,
    pub country: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct AddressPatch {
    #[validate(length(min = 1, max = 100))]
    pub street: Option<String>,
    #[validate(length(min = 1, max = 10))]
    pub num_ext: Option<String>,
    #[validate(length(min = 1, max = 8))]
    pub zip_code: Option<String>,
    pub state: Option<i32>,
    pub country: Option<i32>,
}

impl From<Address> for AddressPatch {
    fn from(a: Address) -> Self {
        Self {
            street: Some(a.street),
            num_ext: Some(a.num_ext),
            zip_code: Some(a.zip_code),
            state: Some(a.state),
            country: Some(a.country),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MainPhone {
    #[validate(length(min = 1, max = 10))]
    pub number: String,
    #[validate(length(min = 1, max = 50))]
    pub name: String,
    #[validate(length(min = 1, max = 5))]
    pub extension: String,
    pub country: i32,
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct MainPhonePatch {
    #[validate(length(min = 1, max = 10))]
    pub number: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 5))]
    pub extension: Option<String>,
    pub country: Option<i32>,
}

impl From<MainPhone> for MainPhonePatch {
    fn from(p: MainPhone) -> Self {
        Self {
            number: Some(p.number),
            name: Some(p.name),
            extension: Some(p.extension),
            country: Some(p.country),
        }
    }
}

/// Body of `POST /companies` and `PUT /companies/{id}`.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CompanyPayload {
    #[validate(length(min = 1, max = 64))]
    pub business_name: String,
    #[serde(default)]
    #[validate(length(max = 200), custom(function = "validate_website"))]
    pub website: String,
    pub industry: i32,
    #[serde(default)]
    pub product_categories: Vec<i32>,
    pub address: Address,
    pub main_phone: MainPhone,
}

impl CompanyPayload {
    pub fn to_new(&self) -> NewCompany {
        NewCompany {
            business_name: self.business_name.clone(),
            website: self.website.clone(),
            street: self.address.street.clone(),
            num_ext: self.address.num_ext.clone(),
            zip_code: self.address.zip_code.clone(),
            state_id: self.address.state,
            country_id: self.address.country,
            phone_number: self.main_phone.number.clone(),
            phone_name: self.main_phone.name.clone(),
            phone_extension: self.main_phone.extension.clone(),
            phone_country_id: self.main_phone.country,
            industry_id: self.industry,
        }
    }
}

/// Body of `PATCH /companies/{id}`; nested groups may be partial too.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CompanyPatch {
    #[validate(length(min = 1, max = 64))]
    pub business_name: Option<String>,
    #[validate(length(max = 200), custom(function = "validate_website"))]
    pub website: Option<String>,
    pub industry: Option<i32>,
    pub product_categories: Option<Vec<i32>>,
    pub address: Option<AddressPatch>,
    pub main_phone: Option<MainPhonePatch>,
}

impl From<CompanyPayload> for CompanyPatch {
    fn from(c: CompanyPayload) -> Self {
        Self {
            business_name: Some(c.business_name),
            website: Some(c.website),
            industry: Some(c.industry),
            product_categories: Some(c.product_categories),
            address: Some(c.address.into()),
            main_phone: Some(c.main_phone.into()),
        }
    }
}

impl CompanyPatch {
    pub fn changes(&self) -> CompanyChanges {
        let address = self.address.clone().unwrap_or_default();
        let phone = self.main_phone.clone().unwrap_or_default();
        CompanyChanges {
            business_name: self.business_name.clone(),
            website: self.website.clone(),
            street: address.street,
            num_ext: address.num_ext,
            zip_code: address.zip_code,
            state_id: address.state,
            country_id: address.country,
            phone_number: phone.number,
            phone_name: phone.name,
            phone_extension: phone.extension,
            phone_country_id: phone.country,
            industry_id: self.industry,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CompanyView {
    pub id: i32,
    pub business_name: String,
    pub website: String,
    pub industry: i32,
    pub product_categories: Vec<i32>,
    pub address: Address,
    pub main_phone: MainPhone,
}

impl From<(Company, Vec<i32>)> for CompanyView {
    fn from((c, product_categories): (Company, Vec<i32>)) -> Self {
        Self {
            id: c.id,
            business_name: c.business_name,
            website: c.website,
            industry: c.industry_id,
            product_categories,
            address: Address {
                street: c.street,
                num_ext: c.num_ext,
                zip_code: c.zip_code,
                state: c.state_id,
                country: c.country_id,
            },
            main_phone: MainPhone {
                number: c.phone_number,
                name: c.phone_name,
                extension: c.phone_extension,
                country: c.phone_country_id,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn website_accepts_empty_and_http_urls() {
        assert!(validate_website("").is_ok());
        assert!(validate_website("https://example.com/about").is_ok());
        assert!(validate_website("lnphi123").is_err());
        assert!(validate_website("ftp://example.com").is_err());
    }

    #[test]
    fn patch_maps_nested_groups_to_columns() {
        let patch = CompanyPatch {
            address: Some(AddressPatch {
                zip_code: Some("31000".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let changes = patch.changes();
        assert_eq!(changes.zip_code.as_deref(), Some("31000"));
        assert!(changes.street.is_none());
        assert!(changes.phone_number.is_none());
    }
}

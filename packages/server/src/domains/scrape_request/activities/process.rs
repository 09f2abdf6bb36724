//! Turn a scrape request into a directory organization.
//!
//! pending → processing → completed (with the organization id) or failed
//! (with the error message).

use anyhow::{Context, Result};

use crate::common::ScrapeRequestId;
use crate::domains::organization::{OrgType, Organization, OrganizationData};
use crate::domains::scrape_request::ScrapeRequest;
use crate::domains::scraping::{scrape_organization, ScrapedOrgData, UNKNOWN_ORGANIZATION};
use crate::kernel::ServerDeps;

/// Merge scraped fields with what the requester supplied
pub fn organization_data(request: &ScrapeRequest, scraped: ScrapedOrgData) -> OrganizationData {
    let name = if scraped.name == UNKNOWN_ORGANIZATION {
        request.org_name.clone()
    } else {
        scraped.name
    };

    OrganizationData {
        school_id: request.school_id,
        name,
        org_type: scraped
            .org_type
            .or_else(|| request.suggested_type())
            .unwrap_or(OrgType::Club),
        description: scraped.description,
        website_url: Some(request.website_url.clone()),
        application_deadline: scraped.application_deadline,
        application_requirements: scraped.application_requirements,
        contact_email: scraped.contact_email,
        is_verified: false,
    }
}

/// Scrape the request's website and upsert the organization.
///
/// Returns `Ok(None)` without scraping when another worker already claimed the
/// request. Failures after the claim are recorded on the request and returned.
pub async fn process_scrape_request(
    id: ScrapeRequestId,
    deps: &ServerDeps,
) -> Result<Option<Organization>> {
    let pool = &deps.db_pool;
    ScrapeRequest::find_by_id(id, pool)
        .await
        .with_context(|| format!("Scrape request {} not found", id))?;

    let Some(request) = ScrapeRequest::claim(id, pool).await? else {
        tracing::info!(request_id = %id, "Scrape request already claimed, skipping");
        return Ok(None);
    };
    tracing::info!(request_id = %id, url = %request.website_url, "Processing scrape request");

    let result = async {
        let scraped = scrape_organization(deps.web_scraper.as_ref(), &request.website_url).await?;
        let data = organization_data(&request, scraped);
        let (organization, created) = Organization::upsert(&data, pool).await?;
        if created {
            tracing::info!(organization_id = %organization.id, name = %organization.name, "Created new organization");
        } else {
            tracing::info!(organization_id = %organization.id, name = %organization.name, "Updated existing organization");
        }
        anyhow::Ok(organization)
    }
    .await;

    match result {
        Ok(organization) => {
            ScrapeRequest::mark_completed(id, organization.id, pool).await?;
            Ok(Some(organization))
        }
        Err(e) => {
            tracing::error!(request_id = %id, error = %e, "Scrape request failed");
            ScrapeRequest::mark_failed(id, &format!("{:#}", e), pool).await?;
            Err(e)
        }
    }
}

/// Process every pending request in creation order; returns how many were attempted.
///
/// Requests claimed elsewhere in the meantime are skipped.
pub async fn process_pending_requests(deps: &ServerDeps) -> Result<usize> {
    let pending = ScrapeRequest::find_pending(&deps.db_pool).await?;
    let count = pending.len();

    for request in pending {
        if let Err(e) = process_scrape_request(request.id, deps).await {
            tracing::warn!(request_id = %request.id, error = %e, "Pending scrape request not completed");
        }
    }

    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{SchoolId, UserId};
    use chrono::Utc;

    fn request(suggested_type: Option<&str>) -> ScrapeRequest {
        ScrapeRequest {
            id: ScrapeRequestId::new(),
            user_id: UserId::new(),
            school_id: SchoolId::new(),
            org_name: "Texas Product Club".to_string(),
            website_url: "https://txproduct.org".to_string(),
            suggested_type: suggested_type.map(str::to_string),
            status: "processing".to_string(),
            organization_id: None,
            error_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn scraped(name: &str, org_type: Option<OrgType>) -> ScrapedOrgData {
        ScrapedOrgData {
            name: name.to_string(),
            description: None,
            org_type,
            contact_email: Some("hello@txproduct.org".to_string()),
            application_requirements: None,
            application_deadline: None,
        }
    }

    #[test]
    fn unknown_name_falls_back_to_requested_name() {
        let data = organization_data(&request(None), scraped(UNKNOWN_ORGANIZATION, None));
        assert_eq!(data.name, "Texas Product Club");
        assert_eq!(data.org_type, OrgType::Club);
        assert!(!data.is_verified);
        assert_eq!(data.website_url.as_deref(), Some("https://txproduct.org"));
    }

    #[test]
    fn type_prefers_scraped_then_suggested() {
        let data = organization_data(
            &request(Some("academic")),
            scraped("TXP", Some(OrgType::Professional)),
        );
        assert_eq!(data.name, "TXP");
        assert_eq!(data.org_type, OrgType::Professional);

        let data = organization_data(&request(Some("academic")), scraped("TXP", None));
        assert_eq!(data.org_type, OrgType::Academic);
    }
}

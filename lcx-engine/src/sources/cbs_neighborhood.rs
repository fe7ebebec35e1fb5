//! CBS StatLine "Kerncijfers wijken en buurten" client
//!
//! Queries OData table 85618NED for the most specific region code the
//! location carries (neighborhood, then district, then municipality).

use super::{json_f64, json_i64, json_str, NeighborhoodStatsSource, SourceError};
use crate::types::{NeighborhoodStats, ResolvedLocation};
use chrono::Utc;
use lcx_common::config::EnrichmentConfig;
use lcx_common::geo::pad_region_code;
use serde_json::Value;
use tracing::{debug, warn};

pub const TABLE_ID: &str = "85618NED";

const SELECT_FIELDS: &[&str] = &[
    "WijkenEnBuurten",
    "SoortRegio_2",
    "AantalInwoners_5",
    "Mannen_6",
    "Vrouwen_7",
    "k_0Tot15Jaar_8",
    "k_15Tot25Jaar_9",
    "k_25Tot45Jaar_10",
    "k_45Tot65Jaar_11",
    "k_65JaarOfOuder_12",
    "HuishoudensTotaal_28",
    "Eenpersoonshuishoudens_30",
    "HuishoudensZonderKinderen_31",
    "HuishoudensMetKinderen_32",
    "GemiddeldeHuishoudensgrootte_33",
    "Bevolkingsdichtheid_34",
    "GemiddeldeWOZWaardeVanWoningen_36",
    "PercentageMeergezinswoning_38",
    "Koopwoningen_41",
    "HuurwoningenTotaal_42",
    "InBezitWoningcorporatie_43",
    "InBezitOverigeVerhuurders_44",
    "BouwjaarVoor2000_46",
    "BouwjaarVanaf2000_47",
    "BasisonderwijsVmboMbo1_70",
    "HavoVwoMbo24_71",
    "HboWo_72",
    "HuishoudensMetEenLaagInkomen_73",
    "GemiddeldInkomenPerInkomensontvanger_80",
    "GemiddeldInkomenPerInwoner_81",
    "PersonenautoSTotaal_109",
    "PersonenautoSPerHuishouden_112",
    "PersonenautoSNaarOppervlakte_113",
    "AfstandTotHuisartsenpraktijk_115",
    "AfstandTotGroteSupermarkt_116",
    "AfstandTotKinderdagverblijf_117",
    "AfstandTotSchool_118",
    "ScholenBinnen3Km_119",
    "MateVanStedelijkheid_125",
];

/// CBS neighborhood statistics client
pub struct CbsNeighborhoodClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl CbsNeighborhoodClient {
    pub fn new(config: &EnrichmentConfig) -> Result<Self, SourceError> {
        Ok(Self::with_client(
            super::build_http_client(config)?,
            &config.cbs_base_url,
        ))
    }

    pub fn with_client(http_client: reqwest::Client, base_url: &str) -> Self {
        Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn query_url(&self, region_code: &str) -> Result<reqwest::Url, SourceError> {
        reqwest::Url::parse_with_params(
            &format!("{}/{}/TypedDataSet", self.base_url, TABLE_ID),
            &[
                ("$filter", format!("WijkenEnBuurten eq '{}'", region_code)),
                ("$top", "1".to_string()),
                ("$select", SELECT_FIELDS.join(",")),
            ],
        )
        .map_err(|e| SourceError::Network(format!("Invalid CBS URL: {}", e)))
    }

    async fn fetch_for_code(&self, region_code: &str) -> Result<Option<NeighborhoodStats>, SourceError> {
        let url = self.query_url(region_code)?;
        debug!(region = %region_code.trim(), url = %url, "Querying CBS neighborhood statistics");

        let response = self.http_client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(
                region = %region_code.trim(),
                status = status.as_u16(),
                "CBS lookup failed; trying next region level"
            );
            return Ok(None);
        }

        let body: Value = match response.json().await {
            Ok(body) => body,
            Err(e) => {
                warn!(region = %region_code.trim(), error = %e, "CBS lookup returned invalid JSON");
                return Ok(None);
            }
        };

        Ok(parse_neighborhood_response(&body, region_code))
    }
}

#[async_trait::async_trait]
impl NeighborhoodStatsSource for CbsNeighborhoodClient {
    async fn fetch(&self, location: &ResolvedLocation) -> Result<Option<NeighborhoodStats>, SourceError> {
        for code in candidate_codes(location) {
            if let Some(stats) = self.fetch_for_code(&code).await? {
                return Ok(Some(stats));
            }
        }

        debug!(query = %location.query, "No CBS region matched the location");
        Ok(None)
    }
}

/// Region codes to try, most specific first, padded to the OData key width
pub fn candidate_codes(location: &ResolvedLocation) -> Vec<String> {
    [
        &location.neighborhood_code,
        &location.district_code,
        &location.municipality_code,
    ]
    .into_iter()
    .filter_map(|code| code.as_deref())
    .map(str::trim)
    .filter(|code| !code.is_empty())
    .map(pad_region_code)
    .collect()
}

/// Map the first OData row into a snapshot; `None` when the result set is empty
pub fn parse_neighborhood_response(body: &Value, requested_code: &str) -> Option<NeighborhoodStats> {
    let row = body.get("value")?.as_array()?.first()?;

    let region_code = json_str(row, "WijkenEnBuurten").unwrap_or_else(|| requested_code.trim().to_string());
    let region_type = json_str(row, "SoortRegio_2").unwrap_or_else(|| "Onbekend".to_string());

    let stats = NeighborhoodStats {
        residents: json_i64(row, "AantalInwoners_5"),
        population_density: json_f64(row, "Bevolkingsdichtheid_34"),
        average_woz_k: json_f64(row, "GemiddeldeWOZWaardeVanWoningen_36"),
        low_income_households_pct: json_f64(row, "HuishoudensMetEenLaagInkomen_73"),

        men: json_i64(row, "Mannen_6"),
        women: json_i64(row, "Vrouwen_7"),
        age_0_15: json_i64(row, "k_0Tot15Jaar_8"),
        age_15_25: json_i64(row, "k_15Tot25Jaar_9"),
        age_25_45: json_i64(row, "k_25Tot45Jaar_10"),
        age_45_65: json_i64(row, "k_45Tot65Jaar_11"),
        age_65_plus: json_i64(row, "k_65JaarOfOuder_12"),

        total_households: json_i64(row, "HuishoudensTotaal_28"),
        single_households: json_i64(row, "Eenpersoonshuishoudens_30"),
        households_without_children: json_i64(row, "HuishoudensZonderKinderen_31"),
        households_with_children: json_i64(row, "HuishoudensMetKinderen_32"),
        avg_household_size: json_f64(row, "GemiddeldeHuishoudensgrootte_33"),

        urbanity: json_str(row, "MateVanStedelijkheid_125"),
        avg_income_per_recipient_k: json_f64(row, "GemiddeldInkomenPerInkomensontvanger_80"),
        avg_income_per_inhabitant_k: json_f64(row, "GemiddeldInkomenPerInwoner_81"),
        education_low: json_i64(row, "BasisonderwijsVmboMbo1_70"),
        education_medium: json_i64(row, "HavoVwoMbo24_71"),
        education_high: json_i64(row, "HboWo_72"),

        pct_owner_occupied: json_f64(row, "Koopwoningen_41"),
        pct_rental: json_f64(row, "HuurwoningenTotaal_42"),
        pct_social_housing: json_f64(row, "InBezitWoningcorporatie_43"),
        pct_private_rental: json_f64(row, "InBezitOverigeVerhuurders_44"),
        pct_built_pre_2000: json_f64(row, "BouwjaarVoor2000_46"),
        pct_built_post_2000: json_f64(row, "BouwjaarVanaf2000_47"),
        pct_multi_family: json_f64(row, "PercentageMeergezinswoning_38"),

        cars_per_household: json_f64(row, "PersonenautoSPerHuishouden_112"),
        car_density: json_f64(row, "PersonenautoSNaarOppervlakte_113"),
        total_cars: json_i64(row, "PersonenautoSTotaal_109"),

        dist_gp_km: json_f64(row, "AfstandTotHuisartsenpraktijk_115"),
        dist_supermarket_km: json_f64(row, "AfstandTotGroteSupermarkt_116"),
        dist_daycare_km: json_f64(row, "AfstandTotKinderdagverblijf_117"),
        dist_school_km: json_f64(row, "AfstandTotSchool_118"),
        schools_within_3km: json_f64(row, "ScholenBinnen3Km_119"),

        ..NeighborhoodStats::empty(region_code, region_type)
    };

    if stats.residents.is_none() || stats.population_density.is_none() {
        debug!(region = %stats.region_code, "CBS {} returned partial data", TABLE_ID);
    }

    Some(stats)
}

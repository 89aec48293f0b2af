use crate::infra::load_catalog;
use clap::Args;
use espaco_vital::catalog::import::apply_seed;
use espaco_vital::catalog::search::search;
use espaco_vital::catalog::{
    CatalogRepository, CatalogSeed, ImportSummary, InMemoryCatalog, SearchPage, SearchParams,
    Visibility,
};
use espaco_vital::config::AppConfig;
use espaco_vital::error::AppError;
use espaco_vital::site::{FaqCategory, InMemorySite, NewFaq, SiteRepository};
use std::path::PathBuf;

const DEMO_CATALOG: &str = include_str!("../data/demo_catalog.json");

const DEMO_FAQS: &[(FaqCategory, u32, &str, &str)] = &[
    (
        FaqCategory::General,
        1,
        "O que é o Espaço Vital?",
        "Uma plataforma que conecta você a terapeutas e espaços terapêuticos de confiança.",
    ),
    (
        FaqCategory::Clients,
        1,
        "Como encontro um terapeuta?",
        "Use a busca filtrando por especialidade, cidade, modalidade de atendimento e público.",
    ),
    (
        FaqCategory::Clients,
        2,
        "O contato com o terapeuta tem custo?",
        "Não. O envio de mensagens pelo perfil do terapeuta é gratuito.",
    ),
    (
        FaqCategory::Therapists,
        1,
        "Como faço para aparecer na busca?",
        "Cadastre seu perfil profissional e aguarde a verificação da equipe.",
    ),
    (
        FaqCategory::Spaces,
        1,
        "Posso cadastrar meu espaço terapêutico?",
        "Sim. Escolha o tipo de perfil \"Espaços\" ao criar sua conta.",
    ),
];

/// Loads the bundled catalog used when no seed or locations file is configured.
pub(crate) fn load_demo_catalog(catalog: &InMemoryCatalog) -> Result<ImportSummary, AppError> {
    let seed = CatalogSeed::from_reader(DEMO_CATALOG.as_bytes())?;
    Ok(apply_seed(catalog, seed)?)
}

pub(crate) fn load_demo_site(site: &InMemorySite) -> Result<usize, AppError> {
    for (category, order, question, answer) in DEMO_FAQS {
        site.insert_faq(NewFaq {
            question: (*question).to_string(),
            answer: (*answer).to_string(),
            category: *category,
            order: *order,
            is_active: true,
        })?;
    }
    Ok(DEMO_FAQS.len())
}

#[derive(Args, Debug, Default)]
pub(crate) struct SearchArgs {
    /// Specialty id to include; repeat the flag for more than one
    #[arg(long = "especialidade")]
    pub(crate) specialties: Vec<String>,
    /// City id
    #[arg(long = "cidade")]
    pub(crate) city: Option<String>,
    /// State id
    #[arg(long = "estado")]
    pub(crate) state: Option<String>,
    /// Session modality (presencial, online, domicilio); repeatable
    #[arg(long = "modalidade")]
    pub(crate) modalities: Vec<String>,
    /// Accessibility requirement (sim or nao)
    #[arg(long = "acessibilidade")]
    pub(crate) accessibility: Option<String>,
    /// Profile type (individual or espacos)
    #[arg(long = "perfil")]
    pub(crate) profile_type: Option<String>,
    /// Target audience code
    #[arg(long = "para-quem")]
    pub(crate) target_audience: Option<String>,
    /// Free text matched against names, bios and specialties
    #[arg(long)]
    pub(crate) q: Option<String>,
    /// Sort order (relevancia, melhor_avaliado, mais_experiente, nome)
    #[arg(long = "ordenacao")]
    pub(crate) sort: Option<String>,
    /// Page number, starting at 1
    #[arg(long = "pagina")]
    pub(crate) page: Option<String>,
    /// Catalog seed to search instead of the configured or bundled catalog
    #[arg(long)]
    pub(crate) seed: Option<PathBuf>,
    /// Print the page as JSON
    #[arg(long)]
    pub(crate) json: bool,
}

impl SearchArgs {
    /// The flags as the query pairs the web search form would send.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        pairs.extend(
            self.specialties
                .iter()
                .map(|value| ("especialidades", value.clone())),
        );
        pairs.extend(
            self.modalities
                .iter()
                .map(|value| ("tipos_sessao", value.clone())),
        );
        for (key, value) in [
            ("cidade", &self.city),
            ("estado", &self.state),
            ("acessibilidade", &self.accessibility),
            ("perfil_profissional", &self.profile_type),
            ("para_quem", &self.target_audience),
            ("q", &self.q),
            ("ordenacao", &self.sort),
            ("page", &self.page),
        ] {
            if let Some(value) = value {
                pairs.push((key, value.clone()));
            }
        }
        pairs
    }
}

pub(crate) fn run_search(args: SearchArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if let Some(seed) = args.seed.clone() {
        config.catalog.seed_path = Some(seed);
        config.catalog.locations_csv = None;
    }

    let catalog = load_catalog(&config.catalog)?;
    let snapshot = catalog.snapshot(Visibility::ActiveOnly)?;
    let params = SearchParams::from_pairs(args.query_pairs());
    let page = search(&snapshot, &params);

    if args.json {
        serde_json::to_writer_pretty(std::io::stdout().lock(), &page)
            .map_err(std::io::Error::from)?;
        println!();
    } else {
        print_page(&page, &params);
    }
    Ok(())
}

fn print_page(page: &SearchPage, params: &SearchParams) {
    println!(
        "{} terapeuta(s) encontrado(s) | página {} de {} | ordenação: {}",
        page.total_results,
        page.page.number,
        page.page.total_pages,
        params.sort.label()
    );
    if let Some(location) = &page.location_label {
        println!("Localização: {location}");
    }

    for (position, card) in page.results.iter().enumerate() {
        let mut badges = Vec::new();
        if card.featured {
            badges.push("destaque");
        }
        if card.premium {
            badges.push("premium");
        }
        if card.verified {
            badges.push("verificado");
        }
        let specialties: Vec<&str> = card
            .specialties
            .iter()
            .map(|specialty| specialty.name.as_str())
            .collect();

        println!(
            "{:>2}. {} [{}] {} | {:.1} ({} avaliações) | {} anos | {}",
            position + 1 + (page.page.number - 1) * page.page.page_size,
            card.display_name,
            badges.join(", "),
            card.location.as_deref().unwrap_or("-"),
            card.average_rating,
            card.review_count,
            card.experience_years,
            specialties.join(", ")
        );
    }
}

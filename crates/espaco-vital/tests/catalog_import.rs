use std::path::Path;

use espaco_vital::catalog::import::{
    apply_seed, import_locations, import_locations_file, load_seed_file,
};
use espaco_vital::catalog::{
    CatalogImportError, CatalogRepository, CatalogSeed, ImportSummary, InMemoryCatalog,
    Visibility,
};

const LOCATIONS: &str = "Estado,Sigla,Cidade\n\
Rio de Janeiro, RJ ,Niterói\n\
Rio de Janeiro,RJ,Petrópolis\n\
Rio de Janeiro,RJ,Niterói\n\
Minas Gerais,MG,\n\
Sem Sigla,,Cidade Perdida\n";

#[test]
fn locations_then_seed_share_states_and_cities() {
    let catalog = InMemoryCatalog::new();
    let locations =
        import_locations(&catalog, LOCATIONS.as_bytes()).expect("locations import");
    assert_eq!(locations.states, 2);
    assert_eq!(locations.cities, 2);

    let seed = CatalogSeed::from_reader(
        r#"{
            "states": [{"name": "Rio de Janeiro", "abbreviation": "RJ"}],
            "cities": [{"city": "Niterói", "state": "RJ"}],
            "specialties": [{"name": "Ayurveda"}],
            "therapists": [{
                "full_name": "Joana Reis",
                "display_name": "Joana Reis",
                "location": {"city": "Petrópolis", "state": "RJ"},
                "specialties": [{"specialty": "Ayurveda", "primary": true}]
            }]
        }"#
        .as_bytes(),
    )
    .expect("seed parses");
    let applied = apply_seed(&catalog, seed).expect("seed applies");

    let total = locations.merge(applied);
    assert_eq!(
        total,
        ImportSummary {
            states: 2,
            cities: 2,
            specialties: 1,
            therapists: 1,
            reviews: 0,
        }
    );

    let snapshot = catalog
        .snapshot(Visibility::ActiveOnly)
        .expect("snapshot");
    assert_eq!(snapshot.states.len(), 2);
    assert_eq!(snapshot.cities.len(), 2);
    let joana = &snapshot.therapists[0];
    let label = joana
        .city_id
        .and_then(|city_id| snapshot.location_label(city_id));
    assert_eq!(label.as_deref(), Some("Petrópolis - RJ"));
}

#[test]
fn seed_with_unknown_city_is_rejected() {
    let catalog = InMemoryCatalog::new();
    let seed = CatalogSeed::from_reader(
        r#"{
            "states": [{"name": "Bahia", "abbreviation": "BA"}],
            "therapists": [{
                "full_name": "Rafa Luz",
                "display_name": "Rafa Luz",
                "location": {"city": "Ilhéus", "state": "BA"}
            }]
        }"#
        .as_bytes(),
    )
    .expect("seed parses");

    let error = apply_seed(&catalog, seed).expect_err("city must exist");
    assert!(matches!(
        error,
        CatalogImportError::UnknownReference { kind: "city", .. }
    ));
}

#[test]
fn missing_files_report_their_path() {
    let catalog = InMemoryCatalog::new();
    let path = Path::new("does/not/exist/locations.csv");

    let error = import_locations_file(&catalog, path).expect_err("file is missing");
    match error {
        CatalogImportError::Io { path: reported, .. } => assert_eq!(reported, path),
        other => panic!("unexpected error: {other}"),
    }

    assert!(matches!(
        load_seed_file(Path::new("does/not/exist/seed.json")),
        Err(CatalogImportError::Io { .. })
    ));
}

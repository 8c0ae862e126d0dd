use aptexam_core::db::open_db_in_memory;
use aptexam_core::{GeoRepository, RepoError, SqliteGeoRepository};

#[test]
fn provinces_list_in_name_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeoRepository::new(&conn);

    repo.insert_province("Santa Fe").unwrap();
    repo.insert_province("Buenos Aires").unwrap();
    repo.insert_province("cordoba").unwrap();

    let provinces = repo.list_provinces().unwrap();
    let names: Vec<&str> = provinces.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Buenos Aires", "cordoba", "Santa Fe"]);
}

#[test]
fn find_province_by_name_is_case_insensitive() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeoRepository::new(&conn);

    let id = repo.insert_province("Mendoza").unwrap();
    let found = repo.find_province_by_name("  MENDOZA ").unwrap().unwrap();
    assert_eq!(found.id, id);
    assert!(repo.find_province_by_name("Chubut").unwrap().is_none());
}

#[test]
fn duplicate_province_name_is_a_conflict() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeoRepository::new(&conn);

    repo.insert_province("Mendoza").unwrap();
    let err = repo.insert_province("MENDOZA").unwrap_err();
    assert!(matches!(err, RepoError::Conflict { entity: "province", .. }));
}

#[test]
fn localities_belong_to_their_province_and_list_in_name_order() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeoRepository::new(&conn);

    let cordoba = repo.insert_province("Cordoba").unwrap();
    let santa_fe = repo.insert_province("Santa Fe").unwrap();
    repo.insert_locality(cordoba, "Villa Maria").unwrap();
    let rio = repo.insert_locality(cordoba, "Rio Cuarto").unwrap();
    repo.insert_locality(santa_fe, "Rosario").unwrap();

    let localities = repo.list_localities(cordoba).unwrap();
    let names: Vec<&str> = localities.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Rio Cuarto", "Villa Maria"]);

    let loaded = repo.get_locality(rio).unwrap().unwrap();
    assert_eq!(loaded.province_id, cordoba);
}

#[test]
fn locality_requires_existing_province() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteGeoRepository::new(&conn);

    let err = repo.insert_locality(999, "Nowhere").unwrap_err();
    assert!(matches!(err, RepoError::Conflict { entity: "locality", .. }));
}

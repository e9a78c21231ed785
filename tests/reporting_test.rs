mod common;

use anyhow::Result;
use common::{import_sample, test_service};
use saldo::application::{MissingAccountPolicy, DEFAULT_COLLECTION};
use saldo::io::{write_earnings_csv, Exporter};

#[tokio::test]
async fn test_earnings_report() -> Result<()> {
    let (service, _temp) = test_service().await?;
    import_sample(&service).await?;

    let report = service.earnings_report().await?;

    let rows: Vec<(i64, &str, i64)> = report
        .rows
        .iter()
        .map(|r| (r.number, r.name.as_str(), r.amount))
        .collect();
    assert_eq!(rows, vec![(3000, "Myynti", 25000), (4000, "Ostot", -8000)]);
    assert_eq!(report.total, 17000);
    Ok(())
}

#[tokio::test]
async fn test_earnings_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    import_sample(&service).await?;

    let report = service.earnings_report().await?;
    let mut out = Vec::new();
    write_earnings_csv(&report, &mut out)?;

    assert_eq!(String::from_utf8(out)?, "3000,Myynti,250.00\n4000,Ostot,-80.00\n");
    Ok(())
}

#[tokio::test]
async fn test_export_collection_csv() -> Result<()> {
    let (service, _temp) = test_service().await?;
    import_sample(&service).await?;
    service
        .run_balance_sheet(DEFAULT_COLLECTION, MissingAccountPolicy::Skip)
        .await?;

    let mut out = Vec::new();
    let count = Exporter::new(&service)
        .export_collection_csv(DEFAULT_COLLECTION, &mut out)
        .await?;

    assert_eq!(count, 3);
    assert_eq!(
        String::from_utf8(out)?,
        "number,name,amount\n\
         1910,Pankkitili,1250.00\n\
         2000,Oma pääoma,-1000.00\n\
         2870,Ostovelat,-80.00\n"
    );
    Ok(())
}

#[tokio::test]
async fn test_export_collection_json() -> Result<()> {
    let (service, _temp) = test_service().await?;
    import_sample(&service).await?;
    service
        .run_balance_sheet("tase", MissingAccountPolicy::Skip)
        .await?;

    let mut out = Vec::new();
    Exporter::new(&service)
        .export_collection_json("tase", &mut out)
        .await?;

    let value: serde_json::Value = serde_json::from_slice(&out)?;
    let rows = value.as_array().expect("array of rows");
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["id"], 1910);
    assert_eq!(rows[0]["account"]["name"], "Pankkitili");
    assert_eq!(rows[0]["amount"], 125000);
    Ok(())
}

#[tokio::test]
async fn test_balance_sheet_and_earnings_partition_the_ledger() -> Result<()> {
    let (service, _temp) = test_service().await?;
    import_sample(&service).await?;

    let sheet = service
        .run_balance_sheet(DEFAULT_COLLECTION, MissingAccountPolicy::Skip)
        .await?;
    let earnings = service.earnings_report().await?;

    // Balanced events sum to zero, so the sheet total equals the result
    // (earnings are reported negated).
    assert_eq!(sheet.total()?, earnings.total);
    Ok(())
}

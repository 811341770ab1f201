// tests/prepare_pipeline.rs
//
// End-to-end checks of CSV text -> loader -> preparer -> panels.

use pressure_heatmap::charts::{panel_title, HeatmapPanel};
use pressure_heatmap::data::{
    ColumnRoles, DataLoader, DataPreparer, Dataset, LapSelector, LapValue, PrepareError, Role,
};

const SCENARIO_CSV: &str = "lat,lon,port,lap\n\
40.0,-70.0,5,1\n\
40.1,-70.1,10,2\n\
40.2,-70.2,bad,1\n";

const SESSION_CSV: &str = "time,lat,lon,P1,P2,lap\n\
0.0,51.500,-0.120,-12.5,3.0,1\n\
0.1,51.501,-0.121,-30.0,,1\n\
0.2,51.502,-0.122,-45.5,-8.0,1\n\
0.3,51.503,-0.123,,-9.0,2\n\
0.4,51.504,-0.124,-60.0,-10.0,2\n\
0.5,,-0.125,-70.0,-11.0,2\n\
0.6,51.506,-0.126,-75.0,-12.0,3\n\
0.7,51.507,-0.127,-80.5,-13.0,3\n";

fn load(csv: &str) -> Dataset {
    DataLoader::read_csv_bytes(csv.as_bytes()).unwrap()
}

fn scenario_roles() -> ColumnRoles {
    ColumnRoles::new("lat", "lon", "port", "lap")
}

fn session_roles() -> ColumnRoles {
    ColumnRoles::new("lat", "lon", "P1", "lap")
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn scenario_all_laps_keeps_complete_rows() {
    let dataset = load(SCENARIO_CSV);
    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &LapSelector::All).unwrap();

    assert_eq!(data.len(), 2);
    let rows: Vec<usize> = data.points.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 1]);

    let first = &data.points[0];
    let second = &data.points[1];
    assert!(close(first.x, 5000.0) && close(first.y, -5000.0));
    assert!(close(second.x, -5000.0) && close(second.y, 5000.0));
    assert_eq!(first.value, 5.0);
    assert_eq!(second.value, 10.0);
    assert_eq!(first.lap, LapValue::Integer(1));
}

#[test]
fn scenario_single_lap_centers_on_one_point() {
    let dataset = load(SCENARIO_CSV);
    let selector = LapSelector::Lap("1".to_string());
    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &selector).unwrap();

    assert_eq!(data.len(), 1);
    let point = &data.points[0];
    assert_eq!(point.row, 0);
    assert!(close(point.x, 0.0) && close(point.y, 0.0));
    assert_eq!(point.value, 5.0);
}

#[test]
fn scenario_absent_lap_is_empty_not_an_error() {
    let dataset = load(SCENARIO_CSV);
    let selector = LapSelector::Lap("7".to_string());
    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &selector).unwrap();
    assert!(data.is_empty());
    assert!(data.center.is_none());

    let panels = HeatmapPanel::from_prepared(&data);
    assert_eq!(panels.len(), 1);
    assert!(panels[0].is_empty());
    assert_eq!(panels[0].title, "port – Centered Pressure (Lap 7)");
}

#[test]
fn unparseable_lap_selector_selects_nothing() {
    let dataset = load(SCENARIO_CSV);
    let selector = LapSelector::Lap("first".to_string());
    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &selector).unwrap();
    assert!(data.is_empty());
}

#[test]
fn missing_role_column_is_rejected() {
    let dataset = load(SCENARIO_CSV);
    let roles = ColumnRoles::new("lat", "longitude", "port", "lap");
    match DataPreparer::prepare(&dataset, &roles, &LapSelector::All) {
        Err(PrepareError::InvalidRole { role, column }) => {
            assert_eq!(role, Role::Longitude);
            assert_eq!(column, "longitude");
        }
        other => panic!("expected InvalidRole, got {:?}", other),
    }
}

#[test]
fn point_count_matches_complete_rows() {
    let dataset = load(SESSION_CSV);
    let data = DataPreparer::prepare(&dataset, &session_roles(), &LapSelector::All).unwrap();
    // Row 3 lacks P1, row 5 lacks lat
    let rows: Vec<usize> = data.points.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 1, 2, 4, 6, 7]);
}

#[test]
fn second_port_also_drops_its_missing_rows() {
    let dataset = load(SESSION_CSV);
    let roles = session_roles().with_second_port("P2");
    let data = DataPreparer::prepare(&dataset, &roles, &LapSelector::All).unwrap();
    let rows: Vec<usize> = data.points.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 2, 4, 6, 7]);

    let panels = HeatmapPanel::from_prepared(&data);
    assert_eq!(panels.len(), 2);
    assert_eq!(panels[1].port, "P2");
    assert_eq!(panels[0].positions, panels[1].positions);
    assert_eq!(panels[1].values, vec![3.0, -8.0, -10.0, -12.0, -13.0]);
}

#[test]
fn centered_coordinates_have_zero_mean() {
    let dataset = load(SESSION_CSV);
    for selector in [
        LapSelector::All,
        LapSelector::Lap("1".into()),
        LapSelector::Lap("3".into()),
    ] {
        let data = DataPreparer::prepare(&dataset, &session_roles(), &selector).unwrap();
        let n = data.len() as f64;
        let mean_x = data.points.iter().map(|p| p.x).sum::<f64>() / n;
        let mean_y = data.points.iter().map(|p| p.y).sum::<f64>() / n;
        assert!(mean_x.abs() < 1e-6, "mean x {} for {:?}", mean_x, selector);
        assert!(mean_y.abs() < 1e-6, "mean y {} for {:?}", mean_y, selector);
    }
}

#[test]
fn lap_result_is_subset_of_all_laps() {
    let dataset = load(SESSION_CSV);
    let all = DataPreparer::prepare(&dataset, &session_roles(), &LapSelector::All).unwrap();
    let all_rows: Vec<usize> = all.points.iter().map(|p| p.row).collect();

    for lap in dataset.lap_options("lap").unwrap() {
        let selector = LapSelector::Lap(lap.to_string());
        let data = DataPreparer::prepare(&dataset, &session_roles(), &selector).unwrap();
        assert!(!data.is_empty());
        for point in &data.points {
            assert!(all_rows.contains(&point.row));
            assert_eq!(point.lap, lap);
        }
    }
}

#[test]
fn prepare_is_idempotent_and_leaves_dataset_alone() {
    let dataset = load(SESSION_CSV);
    let before = dataset.dataframe().clone();
    let selector = LapSelector::Lap("2".into());

    let first = DataPreparer::prepare(&dataset, &session_roles(), &selector).unwrap();
    let second = DataPreparer::prepare(&dataset, &session_roles(), &selector).unwrap();
    assert_eq!(first, second);
    assert!(dataset.dataframe().equals_missing(&before));
}

#[test]
fn float_lap_column_matches_integer_text() {
    let csv = "lat,lon,port,lap\n\
10.0,20.0,1.0,1.0\n\
10.1,20.1,2.0,2.0\n\
10.2,20.2,3.0,1.0\n";
    let dataset = load(csv);
    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &LapSelector::Lap("1".into()))
        .unwrap();
    let rows: Vec<usize> = data.points.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 2]);
    assert_eq!(data.points[0].lap, LapValue::Float(1.0));
}

#[test]
fn text_lap_column_compares_trimmed_text() {
    let csv = "lat,lon,port,lap\n\
10.0,20.0,1.0,out\n\
10.1,20.1,2.0,hot\n\
10.2,20.2,3.0,hot\n";
    let dataset = load(csv);
    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &LapSelector::parse(" hot "))
        .unwrap();
    assert_eq!(data.len(), 2);
    assert_eq!(data.points[0].lap, LapValue::Text("hot".into()));
    assert_eq!(
        panel_title("port", &data.selector),
        "port – Centered Pressure (Lap hot)"
    );
}

#[test]
fn lap_options_are_sorted_and_unique() {
    let dataset = load(SESSION_CSV);
    let laps = dataset.lap_options("lap").unwrap();
    assert_eq!(
        laps,
        vec![LapValue::Integer(1), LapValue::Integer(2), LapValue::Integer(3)]
    );
}

#[test]
fn csv_file_loads_from_disk() {
    let path = std::env::temp_dir().join(format!(
        "pressure_heatmap_session_{}.csv",
        std::process::id()
    ));
    std::fs::write(&path, SESSION_CSV).unwrap();

    let mut loader = DataLoader::new();
    let result = loader.load_csv(&path).map(|ds| ds.height());
    let _ = std::fs::remove_file(&path);

    assert_eq!(result.unwrap(), 8);
    assert_eq!(loader.get_row_count(), 8);
    assert_eq!(loader.get_columns()[0], "time");
    assert_eq!(loader.file_path(), Some(&path));
}

#[test]
fn nan_lap_rows_are_dropped() {
    let csv = "lat,lon,port,lap\n\
10.0,20.0,1.0,1.0\n\
10.1,20.1,2.0,NaN\n\
10.2,20.2,3.0,2.0\n";
    let dataset = load(csv);
    assert_eq!(
        dataset.lap_options("lap").unwrap(),
        vec![LapValue::Float(1.0), LapValue::Float(2.0)]
    );

    let all = DataPreparer::prepare(&dataset, &scenario_roles(), &LapSelector::All).unwrap();
    let rows: Vec<usize> = all.points.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 2]);

    let nan_lap = DataPreparer::prepare(&dataset, &scenario_roles(), &LapSelector::Lap("NaN".into()))
        .unwrap();
    assert!(nan_lap.is_empty());
}

#[test]
fn padded_text_laps_are_selectable() {
    let csv = "lat,lon,port,lap\n\
10.0,20.0,1.0, out \n\
10.1,20.1,2.0,in\n\
10.2,20.2,3.0,out\n";
    let dataset = load(csv);
    assert_eq!(
        dataset.lap_options("lap").unwrap(),
        vec![LapValue::Text("in".into()), LapValue::Text("out".into())]
    );

    let data = DataPreparer::prepare(&dataset, &scenario_roles(), &LapSelector::parse("out"))
        .unwrap();
    let rows: Vec<usize> = data.points.iter().map(|p| p.row).collect();
    assert_eq!(rows, vec![0, 2]);
    assert!(data.points.iter().all(|p| p.lap == LapValue::Text("out".into())));
}

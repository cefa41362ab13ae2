//! Reading measurement files and writing model curves

use ndarray::Array1;
use std::fs;
use std::path::PathBuf;
use trmc_rs::cavity::CavityConfig;
use trmc_rs::io::{
    export_text, parse_textdata, read_textdata_file, write_export, TextDataOptions,
};
use trmc_rs::session::default_parameters;

fn temp_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("trmc-rs-{}-{}", std::process::id(), name))
}

const VNA_EXPORT: &str = "\
! network analyzer export
! S11 magnitude squared
Frequency [GHz]\tS11
8.400\t0.9902
8.401\t0.9901
8.402\t0.9899

8.403\t0.9897
END OF DATA
";

#[test]
fn test_measurement_file() {
    let path = temp_path("measurement.txt");
    fs::write(&path, VNA_EXPORT).unwrap();

    let data = read_textdata_file(&path, &TextDataOptions::default()).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(data.header.len(), 3);
    assert_eq!(data.first_line, Some(3));
    let (f, r) = data.xy().unwrap();
    assert_eq!(f.to_vec(), vec![8.400, 8.401, 8.402, 8.403]);
    assert_eq!(r[3], 0.9897);
}

#[test]
fn test_missing_file() {
    let err = read_textdata_file(temp_path("does-not-exist.txt"), &TextDataOptions::default());
    assert!(matches!(err, Err(trmc_rs::TrmcError::Io(_))));
}

#[test]
fn test_export_reads_back_as_measurement() {
    let config = CavityConfig::x_band();
    let params = default_parameters(&config).unwrap();
    let f = Array1::range(8.40, 8.60, 0.005);
    let r = config.reflectance_sweep(&f);

    let path = temp_path("curve.txt");
    write_export(fs::File::create(&path).unwrap(), &params, &f, &r).unwrap();
    let text = fs::read_to_string(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(text, export_text(&params, &f, &r).unwrap());
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[0], "# trmc microwave cavity model");
    assert_eq!(lines[1], "# frequency in GHz");
    assert_eq!(lines[2], "# d1 = 36.0, fixed = true");
    assert_eq!(lines[4], "# d_iris = 9.6, fixed = false");
    assert_eq!(lines[5], "# loss_fac = 1e-07, fixed = false");
    assert!(lines.contains(&"# copper_S = 55000000.0, fixed = true"));

    let data = parse_textdata(&text, &TextDataOptions::default());
    assert_eq!(data.header.len(), 13);
    assert_eq!(data.rows(), f.len());
    let (f_back, r_back) = data.xy().unwrap();
    for (a, b) in r_back.iter().zip(r.iter()) {
        // six significant digits
        assert!((a - b).abs() <= 5e-6 * b.abs());
    }
    assert!((f_back[1] - 8.405).abs() < 1e-12);
}

#[test]
fn test_decimal_comma_measurement() {
    let text = "Frequenz (GHz);R\n8,40;0,9902\n8,41;0,9800\n";
    let data = parse_textdata(
        text,
        &TextDataOptions {
            decimal_comma: true,
        },
    );
    let (f, r) = data.xy().unwrap();
    assert_eq!(f.to_vec(), vec![8.40, 8.41]);
    assert_eq!(r.to_vec(), vec![0.9902, 0.98]);
}

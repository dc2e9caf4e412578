use {
    super::*,
    chrono::NaiveDate,
    std::fs,
    tempfile::tempdir,
};

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 5, 1)
        .and_then(|d| d.and_hms_opt(h, m, s))
        .unwrap()
}

mod record_tests {
    use super::*;

    #[test]
    fn formats_each_value_exactly() {
        let record = HistoryRecord {
            timestamp: at(12, 0, 0),
            values: vec![12.5, 3.0, 100.0, 0.0, 30.26],
        };
        assert_eq!(
            record.to_string(),
            "2024-05-01 12:00:00,12.5,3.0,100.0,0.0,30.26"
        );
    }

    #[test]
    fn parses_a_line() {
        let record = "2024-05-01 09:30:05,12.5,3\n".parse::<HistoryRecord>().unwrap();
        assert_eq!(record.timestamp, at(9, 30, 5));
        assert_eq!(record.values, vec![12.5, 3.0]);
    }

    #[test]
    fn bad_timestamp() {
        let err = "yesterday,1.0".parse::<HistoryRecord>().unwrap_err();
        assert!(matches!(err, RecordParseError::Timestamp(_)));
    }

    #[test]
    fn bad_value() {
        let err = "2024-05-01 09:30:05,1.0,lots"
            .parse::<HistoryRecord>()
            .unwrap_err();
        assert!(matches!(err, RecordParseError::Value(_)));
    }

    #[test]
    fn trailing_comma_is_rejected() {
        let err = "2024-05-01 09:30:05,1.0,".parse::<HistoryRecord>().unwrap_err();
        assert!(matches!(err, RecordParseError::Value(_)));
    }

    #[test]
    fn no_values() {
        let err = "2024-05-01 09:30:05".parse::<HistoryRecord>().unwrap_err();
        assert_eq!(err, RecordParseError::NoValues);
    }
}

mod writer_tests {
    use super::*;

    #[test]
    fn creates_the_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu_history.txt");
        assert!(!path.exists());

        let writer = HistoryWriter::open(&path).unwrap();
        assert!(path.exists());
        assert_eq!(writer.path(), path.as_path());
    }

    #[test]
    fn appends_one_line_per_write() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu_history.txt");

        let mut writer = HistoryWriter::open(&path).unwrap();
        writer.write(at(12, 0, 0), &[10.0, 20.0]).unwrap();
        writer.write(at(12, 0, 1), &[30.26, 40.0]).unwrap();

        let contents = fs::read_to_string(&path).unwrap();
        assert_eq!(
            contents,
            "2024-05-01 12:00:00,10.0,20.0\n2024-05-01 12:00:01,30.26,40.0\n"
        );
    }

    #[test]
    fn never_truncates_existing_history() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu_history.txt");
        fs::write(&path, "2024-04-30 23:59:59,1.0\n").unwrap();

        let mut writer = HistoryWriter::open(&path).unwrap();
        writer.write(at(0, 0, 0), &[2.0]).unwrap();
        drop(writer);

        let mut writer = HistoryWriter::open(&path).unwrap();
        writer.write(at(0, 0, 1), &[3.0]).unwrap();

        let records = fs::read_to_string(&path)
            .unwrap()
            .lines()
            .map(str::parse::<HistoryRecord>)
            .collect::<Result<Vec<_>, _>>()
            .unwrap();
        let values = records.iter().map(|r| r.values[0]).collect::<Vec<_>>();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn writes_are_readable_back() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cpu_history.txt");
        let mut writer = HistoryWriter::open(&path).unwrap();

        let observations = [vec![0.0, 99.9, 100.0], vec![12.34, 0.05, 78.9]];
        for (s, values) in observations.iter().enumerate() {
            writer.write(at(8, 0, s as u32), values).unwrap();
        }

        let contents = fs::read_to_string(&path).unwrap();
        for (line, expected) in contents.lines().zip(&observations) {
            let record = line.parse::<HistoryRecord>().unwrap();
            assert_eq!(&record.values, expected);
        }
        assert_eq!(contents.lines().count(), observations.len());
    }

    #[test]
    fn missing_directory_fails_to_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("missing").join("cpu_history.txt");
        let err = HistoryWriter::open(&path).unwrap_err();
        assert!(err.to_string().contains("cpu_history.txt"));
    }
}

mod mock_tests {
    use super::*;

    #[test]
    fn fails_only_on_the_requested_write() {
        let mut history = MockHistory::default().fail_on(1);
        assert!(history.write(at(0, 0, 0), &[1.0]).is_ok());
        assert!(history.write(at(0, 0, 1), &[2.0]).is_err());
        assert!(history.write(at(0, 0, 2), &[3.0]).is_ok());

        let values = history
            .records()
            .iter()
            .map(|r| r.values.clone())
            .collect::<Vec<_>>();
        assert_eq!(values, vec![vec![1.0], vec![3.0]]);
    }
}

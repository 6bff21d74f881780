use crate::models::SummaryRow;
use rust_decimal::Decimal;

/// Renders the e-mail body: month header plus the Name/DAILY/MTD table.
/// Rows where both figures are zero are left out.
pub(super) fn render(month_label: &str, rows: &[SummaryRow]) -> String {
    let table_rows: String = rows
        .iter()
        .filter(|row| row.daily > Decimal::ZERO || row.mtd > Decimal::ZERO)
        .map(|row| {
            format!(
                "          <tr>\n              <td>{}</td>\n              <td>{}</td>\n              <td>{}</td>\n          </tr>\n",
                row.name,
                row.daily.round_dp(3),
                row.mtd.round_dp(3),
            )
        })
        .collect();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8">
  <meta name="viewport" content="width=device-width, initial-scale=1.0">
  <title>Benzene Aggregated Table</title>
  <style>
      body {{
          font-family: Arial, sans-serif;
          line-height: 1.6;
          color: #333;
          max-width: 800px;
          margin: 0 auto;
          padding: 20px;
      }}
      .table-container {{
          width: 100%;
          border-collapse: collapse;
          margin-bottom: 20px;
      }}
      .table-container th,
      .table-container td {{
          border: 1px solid #ddd;
          padding: 8px;
          text-align: left;
      }}
      .table-container th {{
          background-color: #f2f2f2;
          font-weight: bold;
      }}
      .header {{
          background-color: #f8f8f8;
          padding: 10px;
          text-align: center;
          font-weight: bold;
          margin-bottom: 20px;
      }}
  </style>
</head>
<body>
  <div class="header">
      {month_label} Benzene
  </div>

  <table class="table-container">
      <thead>
          <tr>
              <th>Name</th>
              <th>DAILY</th>
              <th>MTD</th>
          </tr>
      </thead>
      <tbody>
{table_rows}      </tbody>
  </table>

  <p>
      This is the aggregated data for Benzene production. The table shows
      the daily and month-to-date (MTD) figures for the specified location.
  </p>
</body>
</html>
"#
    )
}

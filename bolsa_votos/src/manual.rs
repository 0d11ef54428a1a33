/*!

This is the long-form manual for `bolsa_votos` and `bolsavotos`.

## Input files

Two files are needed.

### Votes

The results by voting section published by the electoral court
(`votacao_secao_2022_BR.csv`). The file is expected to be:
* delimited by semicolons (`;`),
* encoded in `iso-8859-1` (any label known to the WHATWG encoding standard can be
  configured instead),
* with a header row containing at least the columns `NR_TURNO`, `NR_VOTAVEL`,
  `SG_UF`, `NM_VOTAVEL` and `QT_VOTOS`.

Only the lines of the second round (`NR_TURNO = 2`) for the ballot numbers 13 and 22
are kept. Blank and null votes (numbers 95 and 96) and the first round are ignored.

### Welfare payments

The payments of the Bolsa Família program. Two providers are supported:
* `parquet` (default): the columns `UF` (text, possibly dictionary-encoded) and
  `VALOR PARCELA` (floating point, integer, decimal or text),
* `csv`: the file published by the transparency portal, with the same column names,
  delimited by semicolons and encoded in `iso-8859-1`.

Amounts written as text follow the Brazilian notation (`1.234,56`). Lines with a
missing state or a missing amount are ignored.

## Configuration

The program can be run with the paths of the two files only:

```bash
bolsavotos --votes votacao/votacao_secao_2022_BR.csv --welfare bronze/bolsa_familia.parquet
```

or with a configuration file in JSON format. All the fields are optional, except the
paths of the two files. Relative paths are resolved from the directory of the
configuration file.

```json
{
  "sources": {
    "votes": {
      "provider": "csv",
      "filePath": "../votacao/votacao_secao_2022_BR.csv",
      "delimiter": ";",
      "encoding": "iso-8859-1"
    },
    "welfare": {
      "provider": "parquet",
      "filePath": "../bronze/bolsa_familia_str_cache.parquet"
    }
  },
  "rules": {
    "turn": 2,
    "candidateCodes": [13, 22],
    "candidateA": { "label": "Lula", "pattern": "LULA" },
    "candidateB": { "label": "Bolsonaro", "pattern": "BOLSONARO" },
    "missingCandidatePolicy": "dropState"
  },
  "output": {
    "chartsDirectory": "charts",
    "chartFormat": "svg",
    "renderCharts": true
  }
}
```

The options given on the command line take precedence over the configuration file.

### `missingCandidatePolicy`

When one of the two candidates has no votes in a state, the margin in that state
is not defined:
* `dropState` (default): the state is left out of the ranking and reported,
* `treatAsZero`: the missing candidate is counted with zero votes.

## Outputs

The national results, the margin between the two candidates, the ranking of the
states and the correlations are printed on the console. Three charts are written in
the charts directory:
* `dashboard`: the votes of each candidate by state, the payments by state and a
  summary of the results,
* `reverse_ranking`: the margin between the two candidates in each state,
* `scatter`: the votes against the payments, one panel per candidate.

With `--out`, the same results are also written in JSON format.

## Errors

The program stops at the first error, and tells in which step it happened:
* the files cannot be read or decoded,
* a column is missing or has an unexpected type,
* one of the two candidates cannot be found in the results,
* a correlation cannot be computed (fewer than two states, or no variation).
*/

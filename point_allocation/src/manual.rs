/*!

This is the long-form manual for `point_allocation` and `pointvote`.

## How voting works

Every participant receives the same budget of points (10 by default) and distributes
it across the projects (7 by default, named `Project 1` to `Project 7`). A ballot is
only accepted when it uses the whole budget, no more and no less.

While a participant is still adjusting the values, each project can be set anywhere
between 0 and the per-project maximum (the budget, unless configured otherwise).
If a change pushes the total above the budget, that project is immediately reduced to
the points that are still available and a warning is shown:

```text
Total exceeds 10. Reducing Project 2 to 2.
```

## Command line

Casting a ballot, with 1-based project numbers. Changes are applied in order, exactly
as if the participant moved the sliders one after the other:

```bash
pointvote vote --set 1=4 --set 2=3 --set 5=3
```

The ballot is recorded only if the total is exactly the budget. Use `--dry-run` to
see the allocation without recording it.

Displaying the results:

```bash
pointvote results
```

```text
Project 1 | ######################################## 13
Project 2 | #########                                3
Project 3 | ######                                   2
Project 4 | ######                                   2
```

`--out results.json` (or `--out stdout`) writes a JSON summary. `--reference expected.json`
compares the summary with a reference file and fails if they differ.

Deleting all the recorded ballots:

```bash
pointvote reset
```

## Configuration

All the settings may be given in a JSON file passed with `--config`. Every key is optional:

```json
{
  "budget": 10,
  "projectCount": 4,
  "projectNames": ["Garden", "Library", "Playground", "Bike lanes"],
  "maxPerProject": 10,
  "logPath": "votes.csv",
  "writeMode": "rewrite"
}
```

Command line flags (`--budget`, `--projects`, `--project-name`, `--log`, `--append`)
override the file.

## The ballot log

Ballots are stored in a CSV file (`votes.csv` in the working directory by default).
The first row holds the project names, each following row is one ballot:

```text
Project 1,Project 2,Project 3,Project 4
3,3,2,2
10,0,0,0
```

The file must be read with the same projects it was written with. If the header does
not match the configured projects, `pointvote` refuses to read or extend it.

With the default `rewrite` mode, the whole file is read and written again for every
ballot. The `append` mode only adds one line at the end of the file. Neither mode locks
the file: two ballots submitted at exactly the same time may overwrite each other.

*/
